pub mod new_token;
pub mod serve;
