mod categories;
pub mod forms;
pub mod handlers;
mod quizzes;
pub mod routes;
mod tags;
mod topics;
mod videos;
