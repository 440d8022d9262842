// Helper for generating UUIDv7 (timestamp-sortable UUIDs).
//
// Projects, invites, test cases and comments use app-side UUIDv7 so that
// ordering by id matches creation order. Users keep PG's gen_random_uuid().

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}
