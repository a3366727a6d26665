//! Domain layer: card and token records, validation, token generation and the
//! ports the application layer drives (stores and the payment gateway).

pub mod card;
pub mod charge;
pub mod generator;
pub mod ports;
pub mod token;
pub mod validator;
