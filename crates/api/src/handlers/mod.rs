pub mod renders;
