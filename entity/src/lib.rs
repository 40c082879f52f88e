pub mod role;
pub mod user;

/*
 Every user points at exactly one role (or none, which grants nothing).
 Roles are seeded once and carry the permission bitmask; users never hold
 permissions of their own.
 */
