pub mod entities;
pub mod get_user_by_id;
pub mod health_check;
pub mod register_user;
pub mod routes;
