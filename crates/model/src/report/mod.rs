pub mod missingness;
