use super::INotificationRepo;
use barbershop_domain::{Notification, NotificationType, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::{TryFrom, TryInto};
use tracing::error;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRaw {
    notification_uid: Uuid,
    user_uid: Uuid,
    notification_type: String,
    title: String,
    message: String,
    read: bool,
    related_uid: Option<Uuid>,
    created: i64,
}

impl TryFrom<NotificationRaw> for Notification {
    type Error = anyhow::Error;

    fn try_from(raw: NotificationRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.notification_uid.into(),
            user_id: raw.user_uid.into(),
            r#type: raw
                .notification_type
                .parse::<NotificationType>()
                .map_err(anyhow::Error::msg)?,
            title: raw.title,
            message: raw.message,
            read: raw.read,
            related_id: raw.related_uid.map(ID::from),
            created: raw.created,
        })
    }
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (notification_uid, user_uid, notification_type, title, message, read, related_uid, created)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.user_id.inner_ref())
        .bind(notification.r#type.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.read)
        .bind(notification.related_id.as_ref().map(|id| *id.inner_ref()))
        .bind(notification.created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, notification_id: &ID) -> Option<Notification> {
        let res: Option<NotificationRaw> = sqlx::query_as(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.notification_uid = $1
            "#,
        )
        .bind(notification_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| error!("Unable to find notification {}: {:?}", notification_id, e))
        .ok()?;
        res.and_then(|raw| raw.try_into().ok())
    }

    async fn find_by_user(&self, user_id: &ID) -> anyhow::Result<Vec<Notification>> {
        sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.user_uid = $1
            ORDER BY n.created DESC
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Notification::try_from)
        .collect()
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Notification>> {
        sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Notification::try_from)
        .collect()
    }

    async fn exists_for(
        &self,
        notification_type: NotificationType,
        related_id: &ID,
    ) -> anyhow::Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notifications AS n
                WHERE n.notification_type = $1 AND n.related_uid = $2
            )
            "#,
        )
        .bind(notification_type.as_str())
        .bind(related_id.inner_ref())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists.0)
    }
}
