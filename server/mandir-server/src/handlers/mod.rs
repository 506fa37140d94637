pub mod accounting;
pub mod assets;
pub mod auth;
pub mod bank;
pub mod devotees;
pub mod donations;
pub mod health;
pub mod hr;
pub mod inventory;
pub mod sevas;
pub mod sponsorships;
