pub mod navlog;
