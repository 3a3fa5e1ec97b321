pub mod cases;
pub mod diagnostics;
pub mod health;
pub mod jobs;
pub mod overview;
pub mod projects;
pub mod results;
pub mod worker;
