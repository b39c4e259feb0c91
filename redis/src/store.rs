//! Redis-based pending reservation store.
//!
//! Reservations are stored in Redis with:
//! - **Primary key**: `reservation:{reservation_id}` → bincode-serialized
//!   `PendingReservation`, with a PX TTL equal to the remaining window
//! - **Event index**: `event:{event_id}:pending` (sorted set) → member
//!   `"{reservation_id}:{quantity}"`, score = expiry in epoch milliseconds
//!
//! The primary key's TTL is what reclaims abandoned reservations without a
//! reaper. The index is advisory and self-cleaning: counting prunes dead
//! members by score inside a Lua script, so a member orphaned by passive
//! payload expiry never reaches an admission decision.

use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tessera_core::{
    EventId, PendingReservation, PendingReservationStore, ReservationError, ReservationId, Result,
};

/// One day in milliseconds; the index key is kept alive this much longer
/// than its newest member so prune-and-sum still sees stragglers.
const INDEX_TTL_BUFFER_MS: i64 = 86_400_000;

/// Atomic prune-and-sum over an event's pending index.
///
/// Members with a score strictly below "now" are past their deadline and
/// removed; the quantities encoded in the surviving members are summed.
/// Running this as one script keeps the count consistent with the prune.
const COUNT_ACTIVE_SCRIPT: &str = r"
    local index_key = KEYS[1]
    local now_ms = ARGV[1]
    redis.call('ZREMRANGEBYSCORE', index_key, '-inf', '(' .. now_ms)
    local members = redis.call('ZRANGE', index_key, 0, -1)
    local total = 0
    for _, member in ipairs(members) do
        local quantity = tonumber(string.match(member, ':(%d+)$'))
        if quantity then
            total = total + quantity
        end
    end
    return total
";

/// Redis-based pending reservation store with TTL-managed expiry.
///
/// # Example
///
/// ```no_run
/// use tessera_redis::RedisReservationStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = RedisReservationStore::new("redis://127.0.0.1:6379").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedisReservationStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisReservationStore {
    /// Create a new Redis reservation store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns error if connection to Redis fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            ReservationError::Store(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            ReservationError::Store(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    /// Get the Redis key for a reservation payload.
    fn reservation_key(reservation_id: ReservationId) -> String {
        format!("reservation:{reservation_id}")
    }

    /// Get the Redis key for an event's pending index.
    fn event_index_key(event_id: EventId) -> String {
        format!("event:{event_id}:pending")
    }

    /// Index member carrying the quantity alongside the id.
    fn index_member(reservation: &PendingReservation) -> String {
        format!("{}:{}", reservation.id, reservation.quantity.get())
    }
}

impl PendingReservationStore for RedisReservationStore {
    async fn put(&self, reservation: &PendingReservation) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let reservation_key = Self::reservation_key(reservation.id);
        let index_key = Self::event_index_key(reservation.event_id);

        let ttl = reservation.ttl_from(Utc::now());
        if ttl <= chrono::Duration::zero() {
            return Err(ReservationError::AlreadyExpired);
        }
        #[allow(clippy::cast_sign_loss)]
        let ttl_ms = ttl.num_milliseconds() as u64;

        let payload = bincode::serialize(reservation)
            .map_err(|e| ReservationError::Serialization(e.to_string()))?;

        // Payload, index member, and index TTL land atomically; a reservation
        // that exists must be countable and vice versa.
        #[allow(clippy::cast_possible_wrap)]
        let index_ttl_ms = ttl_ms as i64 + INDEX_TTL_BUFFER_MS;

        let _: () = redis::pipe()
            .atomic()
            .pset_ex(&reservation_key, payload, ttl_ms)
            .zadd(
                &index_key,
                Self::index_member(reservation),
                reservation.expires_at.timestamp_millis(),
            )
            .ignore()
            .pexpire(&index_key, index_ttl_ms)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| ReservationError::Store(format!("Failed to write reservation: {e}")))?;

        tracing::info!(
            reservation_id = %reservation.id,
            event_id = %reservation.event_id,
            quantity = reservation.quantity.get(),
            ttl_ms,
            "reservation written to Redis"
        );

        Ok(())
    }

    async fn get(&self, reservation_id: ReservationId) -> Result<Option<PendingReservation>> {
        let mut conn = self.conn_manager.clone();
        let reservation_key = Self::reservation_key(reservation_id);

        let payload: Option<Vec<u8>> = conn.get(&reservation_key).await.map_err(|e| {
            ReservationError::Store(format!("Failed to get reservation from Redis: {e}"))
        })?;

        match payload {
            Some(bytes) => {
                let reservation: PendingReservation = bincode::deserialize(&bytes)
                    .map_err(|e| ReservationError::Serialization(e.to_string()))?;

                if reservation.is_expired(Utc::now()) {
                    tracing::warn!(
                        reservation_id = %reservation_id,
                        expires_at = %reservation.expires_at,
                        "reservation past deadline still present (TTL should have cleaned this up)"
                    );
                }

                Ok(Some(reservation))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, reservation_id: ReservationId) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let reservation_key = Self::reservation_key(reservation_id);

        // Fetch first to learn the index member; an absent record leaves at
        // most a dead index member behind, which counting prunes by score.
        if let Some(reservation) = self.get(reservation_id).await? {
            let index_key = Self::event_index_key(reservation.event_id);
            let _: () = redis::pipe()
                .atomic()
                .zrem(&index_key, Self::index_member(&reservation))
                .ignore()
                .del(&reservation_key)
                .ignore()
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    ReservationError::Store(format!("Failed to delete reservation: {e}"))
                })?;
        } else {
            let _: () = conn.del(&reservation_key).await.map_err(|e| {
                ReservationError::Store(format!("Failed to delete reservation: {e}"))
            })?;
        }

        tracing::info!(reservation_id = %reservation_id, "reservation deleted from Redis");

        Ok(())
    }

    async fn count_active_for_event(&self, event_id: EventId) -> Result<u32> {
        let mut conn = self.conn_manager.clone();
        let index_key = Self::event_index_key(event_id);

        let script = redis::Script::new(COUNT_ACTIVE_SCRIPT);
        let total: u32 = script
            .key(&index_key)
            .arg(Utc::now().timestamp_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                ReservationError::Store(format!("Failed to count active reservations: {e}"))
            })?;

        Ok(total)
    }
}
