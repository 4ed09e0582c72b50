//! Player authentication. Tokens come from the account service; see [`jwt`].

pub mod jwt;
