pub mod github;
pub mod projects;
pub mod utils;
pub mod view;
