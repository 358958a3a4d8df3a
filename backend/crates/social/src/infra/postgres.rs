//! PostgreSQL Repository Implementation
//!
//! Arrays on `accounts` and `posts` play the role of document arrays. Every
//! add is `array_append` guarded by `NOT (x = ANY(arr))` and every remove
//! is `array_remove` guarded by `x = ANY(arr)`, so the row count tells
//! whether the call changed anything and concurrent toggles never lose an
//! update. Two-sided edits run in one transaction.

use auth::{UserName, UserRole};
use chrono::{DateTime, Utc};
use kernel::id::{AccountId, PostId, from_uuids, to_uuids};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::post::Post;
use crate::domain::entity::profile::{AccountProfile, AccountRemoval, ProfileUpdate};
use crate::domain::repository::{AccountGraphRepository, PostRepository};
use crate::domain::value_object::{bio::Bio, caption::Caption, image_url::ImageUrl};
use crate::error::{SocialError, SocialResult};

const PROFILE_COLUMNS: &str = r#"
    account_id,
    user_name,
    role,
    profile_pic,
    bio,
    followers,
    following,
    posts,
    liked_posts,
    created_at
"#;

const POST_COLUMNS: &str = r#"
    post_id,
    owner_id,
    image_url,
    caption,
    likes,
    like_count,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed social store
#[derive(Clone)]
pub struct PgSocialRepository {
    pool: PgPool,
}

impl PgSocialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> SocialResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }
}

// ============================================================================
// Account Graph Repository Implementation
// ============================================================================

impl AccountGraphRepository for PgSocialRepository {
    async fn find_account(&self, account_id: &AccountId) -> SocialResult<Option<AccountProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM accounts WHERE account_id = $1"
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn find_accounts(&self, account_ids: &[AccountId]) -> SocialResult<Vec<AccountProfile>> {
        if account_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM accounts WHERE account_id = ANY($1)"
        ))
        .bind(to_uuids(account_ids))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProfileRow::into_profile).collect())
    }

    async fn list_accounts(&self) -> SocialResult<Vec<AccountProfile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM accounts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProfileRow::into_profile).collect())
    }

    async fn update_profile(
        &self,
        account_id: &AccountId,
        update: &ProfileUpdate,
    ) -> SocialResult<Option<AccountProfile>> {
        let result = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE accounts
            SET user_name = COALESCE($2, user_name),
                bio = COALESCE($3, bio),
                profile_pic = COALESCE($4, profile_pic),
                updated_at = now()
            WHERE account_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(account_id.as_uuid())
        .bind(update.user_name.as_ref().map(|n| n.as_str()))
        .bind(update.bio.as_ref().map(|b| b.as_str()))
        .bind(update.profile_pic.as_ref().map(|p| p.as_str()))
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.map(ProfileRow::into_profile)),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(SocialError::Conflict("Username is already taken".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn follow(&self, follower: &AccountId, followee: &AccountId) -> SocialResult<bool> {
        if follower == followee {
            return Ok(false);
        }
        let mut tx = self.begin().await?;

        // None when the follower row is gone.
        let already: Option<bool> = sqlx::query_scalar(
            "SELECT $2 = ANY(following) FROM accounts WHERE account_id = $1 FOR UPDATE",
        )
        .bind(follower.as_uuid())
        .bind(followee.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        match already {
            None => return Err(SocialError::AccountNotFound),
            Some(true) => return Ok(false),
            Some(false) => {}
        }

        let mirrored = sqlx::query(
            r#"
            UPDATE accounts
            SET followers = array_append(array_remove(followers, $1), $1), updated_at = now()
            WHERE account_id = $2
            "#,
        )
        .bind(follower.as_uuid())
        .bind(followee.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if mirrored == 0 {
            tx.rollback().await?;
            return Err(SocialError::AccountNotFound);
        }

        sqlx::query(
            r#"
            UPDATE accounts
            SET following = array_append(following, $2), updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(follower.as_uuid())
        .bind(followee.as_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn unfollow(&self, follower: &AccountId, followee: &AccountId) -> SocialResult<bool> {
        let mut tx = self.begin().await?;

        let removed = sqlx::query(
            r#"
            UPDATE accounts
            SET following = array_remove(following, $2), updated_at = now()
            WHERE account_id = $1 AND $2 = ANY(following)
            "#,
        )
        .bind(follower.as_uuid())
        .bind(followee.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE accounts
            SET followers = array_remove(followers, $1), updated_at = now()
            WHERE account_id = $2
            "#,
        )
        .bind(follower.as_uuid())
        .bind(followee.as_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_account(&self, account_id: &AccountId) -> SocialResult<Option<AccountRemoval>> {
        let mut tx = self.begin().await?;
        let id = account_id.as_uuid();

        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT account_id FROM accounts WHERE account_id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        // Owned posts, with whoever liked them.
        let deleted: Vec<(Uuid, Vec<Uuid>)> =
            sqlx::query_as("DELETE FROM posts WHERE owner_id = $1 RETURNING post_id, likes")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;
        let deleted_posts: Vec<Uuid> = deleted.iter().map(|(post_id, _)| *post_id).collect();
        let mut touched: Vec<Uuid> = deleted
            .iter()
            .flat_map(|(_, likes)| likes.iter().copied())
            .filter(|liker| liker != id)
            .collect();

        if !deleted_posts.is_empty() {
            sqlx::query(
                r#"
                UPDATE accounts
                SET liked_posts = ARRAY(
                    SELECT p FROM unnest(liked_posts) AS p WHERE p <> ALL($1)
                )
                WHERE liked_posts && $1
                "#,
            )
            .bind(&deleted_posts)
            .execute(&mut *tx)
            .await?;
        }

        // The account's likes on other posts.
        let unliked: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            UPDATE posts
            SET likes = array_remove(likes, $1),
                like_count = cardinality(array_remove(likes, $1)),
                updated_at = now()
            WHERE $1 = ANY(likes)
            RETURNING post_id, owner_id
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        // Follow edges in both directions.
        let detached: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET followers = array_remove(followers, $1),
                following = array_remove(following, $1),
                updated_at = now()
            WHERE $1 = ANY(followers) OR $1 = ANY(following)
            RETURNING account_id
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        touched.extend(detached);
        touched.sort_unstable();
        touched.dedup();

        sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(AccountRemoval {
            deleted_posts: from_uuids(deleted_posts),
            unliked_posts: unliked
                .into_iter()
                .map(|(post_id, owner)| (PostId::from_uuid(post_id), AccountId::from_uuid(owner)))
                .collect(),
            touched_accounts: from_uuids(touched),
        }))
    }
}

// ============================================================================
// Post Repository Implementation
// ============================================================================

impl PostRepository for PgSocialRepository {
    async fn create_post(&self, post: &Post) -> SocialResult<()> {
        let mut tx = self.begin().await?;

        let appended = sqlx::query(
            r#"
            UPDATE accounts
            SET posts = array_append(posts, $1), updated_at = now()
            WHERE account_id = $2
            "#,
        )
        .bind(post.post_id.as_uuid())
        .bind(post.owner.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if appended == 0 {
            tx.rollback().await?;
            return Err(SocialError::AccountNotFound);
        }

        sqlx::query(
            r#"
            INSERT INTO posts (
                post_id,
                owner_id,
                image_url,
                caption,
                likes,
                like_count,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.post_id.as_uuid())
        .bind(post.owner.as_uuid())
        .bind(post.image_url.as_str())
        .bind(post.caption.as_str())
        .bind(to_uuids(&post.likes))
        .bind(i32::try_from(post.like_count).unwrap_or(i32::MAX))
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_post(&self, post_id: &PostId) -> SocialResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE post_id = $1"
        ))
        .bind(post_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PostRow::into_post))
    }

    async fn list_posts(&self) -> SocialResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }

    async fn list_posts_by_owner(&self, owner: &AccountId) -> SocialResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }

    async fn update_caption(
        &self,
        post_id: &PostId,
        caption: &Caption,
    ) -> SocialResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            UPDATE posts
            SET caption = $2, updated_at = now()
            WHERE post_id = $1
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post_id.as_uuid())
        .bind(caption.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PostRow::into_post))
    }

    async fn delete_post(&self, post_id: &PostId) -> SocialResult<Option<Post>> {
        let mut tx = self.begin().await?;

        let Some(row) = sqlx::query_as::<_, PostRow>(&format!(
            "DELETE FROM posts WHERE post_id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(post_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE accounts
            SET posts = array_remove(posts, $1), updated_at = now()
            WHERE account_id = $2
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(row.owner_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE accounts
            SET liked_posts = array_remove(liked_posts, $1)
            WHERE account_id = ANY($2)
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(&row.likes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into_post()))
    }

    async fn add_like(&self, post_id: &PostId, account_id: &AccountId) -> SocialResult<bool> {
        let mut tx = self.begin().await?;

        // Liker first: a deleted account must not leave its id in `likes`.
        let liker = sqlx::query(
            r#"
            UPDATE accounts
            SET liked_posts = array_append(array_remove(liked_posts, $1), $1)
            WHERE account_id = $2
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(account_id.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if liker == 0 {
            tx.rollback().await?;
            return Err(SocialError::AccountNotFound);
        }

        let added = sqlx::query(
            r#"
            UPDATE posts
            SET likes = array_append(likes, $2),
                like_count = cardinality(likes) + 1
            WHERE post_id = $1 AND NOT ($2 = ANY(likes))
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(account_id.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if added == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn remove_like(&self, post_id: &PostId, account_id: &AccountId) -> SocialResult<bool> {
        let mut tx = self.begin().await?;

        let removed = sqlx::query(
            r#"
            UPDATE posts
            SET likes = array_remove(likes, $2),
                like_count = cardinality(array_remove(likes, $2))
            WHERE post_id = $1 AND $2 = ANY(likes)
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(account_id.as_uuid())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE accounts
            SET liked_posts = array_remove(liked_posts, $1)
            WHERE account_id = $2
            "#,
        )
        .bind(post_id.as_uuid())
        .bind(account_id.as_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ProfileRow {
    account_id: Uuid,
    user_name: String,
    role: i16,
    profile_pic: String,
    bio: String,
    followers: Vec<Uuid>,
    following: Vec<Uuid>,
    posts: Vec<Uuid>,
    liked_posts: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> AccountProfile {
        AccountProfile {
            account_id: AccountId::from_uuid(self.account_id),
            user_name: UserName::from_db(self.user_name),
            role: UserRole::from_id(self.role),
            profile_pic: ImageUrl::from_db(self.profile_pic),
            bio: Bio::from_db(self.bio),
            followers: from_uuids(self.followers),
            following: from_uuids(self.following),
            posts: from_uuids(self.posts),
            liked_posts: from_uuids(self.liked_posts),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    post_id: Uuid,
    owner_id: Uuid,
    image_url: String,
    caption: String,
    likes: Vec<Uuid>,
    like_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            post_id: PostId::from_uuid(self.post_id),
            owner: AccountId::from_uuid(self.owner_id),
            image_url: ImageUrl::from_db(self.image_url),
            caption: Caption::from_db(self.caption),
            likes: from_uuids(self.likes),
            like_count: u32::try_from(self.like_count).unwrap_or(0),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
