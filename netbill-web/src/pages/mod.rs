mod dashboard;
mod error;
mod login;
mod register;
mod resource;

pub use dashboard::DashboardPage;
pub use error::ErrorPage;
pub use login::LoginPage;
pub use register::RegisterPage;
pub use resource::ResourcePage;
