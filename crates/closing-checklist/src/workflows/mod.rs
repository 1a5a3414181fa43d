pub mod closing;
