//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use auth::CurrentAccount;
use kernel::id::{AccountId, PostId};
use platform::cache::CacheStore;

use crate::application::{
    CreatePostInput, CreatePostUseCase, DeleteAccountUseCase, DeletePostUseCase, GetPostUseCase,
    GetProfileUseCase, ListAccountPostsUseCase, ListAccountsUseCase, ListLikesUseCase,
    ListPostsUseCase, ReadThroughCache, ToggleFollowUseCase, ToggleLikeUseCase,
    UpdatePostUseCase, UpdateProfileInput, UpdateProfileUseCase,
};
use crate::domain::repository::SocialRepository;
use crate::error::SocialResult;
use crate::presentation::dto::{
    AccountCardDto, AccountListResponse, AccountListingDto, AccountPostsResponse,
    CreatePostRequest, LikesResponse, MessageResponse, PostDto, PostListResponse,
    PostMutationResponse, PostResponse, ProfileResponse, UpdatePostRequest, UpdateProfileRequest,
    UpdateProfileResponse, UpdatedAccountDto,
};

/// Shared state for social handlers
pub struct SocialAppState<R, C> {
    pub repo: Arc<R>,
    pub cache: ReadThroughCache<C>,
}

impl<R, C> Clone for SocialAppState<R, C> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            cache: self.cache.clone(),
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/users/allUsers
pub async fn list_accounts<R, C>(
    State(state): State<SocialAppState<R, C>>,
) -> SocialResult<Json<AccountListResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let listing = ListAccountsUseCase::new(state.repo.clone(), state.cache.clone())
        .execute()
        .await?;

    Ok(Json(AccountListResponse {
        success: true,
        users: listing.iter().map(AccountListingDto::from).collect(),
    }))
}

/// GET /api/users/profile
pub async fn own_profile<R, C>(
    State(state): State<SocialAppState<R, C>>,
    CurrentAccount(me): CurrentAccount,
) -> SocialResult<Json<ProfileResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let snapshot = GetProfileUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(me.account_id)
        .await?;

    Ok(Json(snapshot.into()))
}

/// GET /api/users/{id}
pub async fn profile<R, C>(
    State(state): State<SocialAppState<R, C>>,
    Path(id): Path<String>,
) -> SocialResult<Json<ProfileResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let account_id: AccountId = id.parse()?;
    let snapshot = GetProfileUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(account_id)
        .await?;

    Ok(Json(snapshot.into()))
}

/// POST /api/users/update-profile
pub async fn update_profile<R, C>(
    State(state): State<SocialAppState<R, C>>,
    CurrentAccount(me): CurrentAccount,
    Json(req): Json<UpdateProfileRequest>,
) -> SocialResult<Json<UpdateProfileResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let profile = UpdateProfileUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(
            me.account_id,
            UpdateProfileInput {
                username: req.username,
                bio: req.bio,
                profile_pic: req.profile_pic,
            },
        )
        .await?;

    Ok(Json(UpdateProfileResponse {
        success: true,
        user: UpdatedAccountDto::from(&profile),
        message: "Profile updated successfully!",
    }))
}

/// POST /api/users/follow/{userId}
pub async fn toggle_follow<R, C>(
    State(state): State<SocialAppState<R, C>>,
    CurrentAccount(me): CurrentAccount,
    Path(user_id): Path<String>,
) -> SocialResult<Json<MessageResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let target: AccountId = user_id.parse()?;
    let outcome = ToggleFollowUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(me.account_id, target)
        .await?;

    Ok(Json(MessageResponse::ok(outcome.message())))
}

/// GET /api/users/posts/{userId}
pub async fn account_posts<R, C>(
    State(state): State<SocialAppState<R, C>>,
    Path(user_id): Path<String>,
) -> SocialResult<Json<AccountPostsResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let owner: AccountId = user_id.parse()?;
    let posts = ListAccountPostsUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(owner)
        .await?;

    Ok(Json(AccountPostsResponse {
        success: true,
        posts: posts.iter().map(|p| PostDto::new(p, None)).collect(),
    }))
}

/// DELETE /api/users/delete-account/{userId}
pub async fn delete_account<R, C>(
    State(state): State<SocialAppState<R, C>>,
    CurrentAccount(me): CurrentAccount,
    Path(user_id): Path<String>,
) -> SocialResult<Json<MessageResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let target: AccountId = user_id.parse()?;
    DeleteAccountUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(me, target)
        .await?;

    Ok(Json(MessageResponse::ok("Account deleted successfully")))
}

// ============================================================================
// Posts
// ============================================================================

/// GET /api/posts/Allposts
pub async fn list_posts<R, C>(
    State(state): State<SocialAppState<R, C>>,
) -> SocialResult<Json<PostListResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let views = ListPostsUseCase::new(state.repo.clone(), state.cache.clone())
        .execute()
        .await?;

    Ok(Json(PostListResponse {
        success: true,
        message: "All posts fetched successfully",
        posts: views.iter().map(PostDto::from).collect(),
    }))
}

/// GET /api/posts/post/{postId}
pub async fn get_post<R, C>(
    State(state): State<SocialAppState<R, C>>,
    Path(post_id): Path<String>,
) -> SocialResult<Json<PostResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let post_id: PostId = post_id.parse()?;
    let view = GetPostUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(post_id)
        .await?;

    Ok(Json(PostResponse {
        success: true,
        data: PostDto::from(&view),
    }))
}

/// GET /api/posts/allLikes/{postId}
pub async fn list_likes<R, C>(
    State(state): State<SocialAppState<R, C>>,
    Path(post_id): Path<String>,
) -> SocialResult<Json<LikesResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let post_id: PostId = post_id.parse()?;
    let likers = ListLikesUseCase::new(state.repo.clone())
        .execute(post_id)
        .await?;

    Ok(Json(LikesResponse {
        success: true,
        likes_count: likers.len(),
        likes: likers.iter().map(AccountCardDto::from).collect(),
    }))
}

/// POST /api/posts/create
pub async fn create_post<R, C>(
    State(state): State<SocialAppState<R, C>>,
    CurrentAccount(me): CurrentAccount,
    Json(req): Json<CreatePostRequest>,
) -> SocialResult<impl IntoResponse>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let post = CreatePostUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(
            me,
            CreatePostInput {
                caption: req.caption,
                image: req.image,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostMutationResponse {
            success: true,
            message: "Post created successfully",
            post: PostDto::new(&post, None),
        }),
    ))
}

/// POST /api/posts/like/{postId}
pub async fn toggle_like<R, C>(
    State(state): State<SocialAppState<R, C>>,
    CurrentAccount(me): CurrentAccount,
    Path(post_id): Path<String>,
) -> SocialResult<Json<PostMutationResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let post_id: PostId = post_id.parse()?;
    let (outcome, post) = ToggleLikeUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(me.account_id, post_id)
        .await?;

    Ok(Json(PostMutationResponse {
        success: true,
        message: outcome.message(),
        post: PostDto::new(&post, None),
    }))
}

/// PUT /api/posts/update/{postId}
pub async fn update_post<R, C>(
    State(state): State<SocialAppState<R, C>>,
    CurrentAccount(me): CurrentAccount,
    Path(post_id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> SocialResult<Json<PostMutationResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let post_id: PostId = post_id.parse()?;
    let post = UpdatePostUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(me, post_id, &req.caption)
        .await?;

    Ok(Json(PostMutationResponse {
        success: true,
        message: "Post updated successfully",
        post: PostDto::new(&post, None),
    }))
}

/// DELETE /api/posts/delete/{postId}
pub async fn delete_post<R, C>(
    State(state): State<SocialAppState<R, C>>,
    CurrentAccount(me): CurrentAccount,
    Path(post_id): Path<String>,
) -> SocialResult<Json<MessageResponse>>
where
    R: SocialRepository,
    C: CacheStore + Send + Sync + 'static,
{
    let post_id: PostId = post_id.parse()?;
    DeletePostUseCase::new(state.repo.clone(), state.cache.clone())
        .execute(me, post_id)
        .await?;

    Ok(Json(MessageResponse::ok("Post deleted successfully")))
}
