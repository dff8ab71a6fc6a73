pub mod channels;
pub mod membership;
pub mod session;
