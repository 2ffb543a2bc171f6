pub mod tree_tests;
