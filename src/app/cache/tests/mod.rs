//! Cache layer tests
