mod login;
mod logout;

pub use login::{login, signup, LoginForm, SignupForm};
pub use logout::logout;
