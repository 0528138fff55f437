pub mod need;
