pub mod credentials;
pub mod email;
pub mod token;

pub use credentials::{generate_otp, hash_password, verify_password};
pub use email::EmailService;
pub use token::{Claims, TokenKind, TokenService};
