pub mod company;
pub mod news;
pub mod portfolio;
pub mod profile;
pub mod quote;
pub mod response;

pub use company::*;
pub use news::*;
pub use portfolio::*;
pub use profile::*;
pub use quote::*;
pub use response::*;
