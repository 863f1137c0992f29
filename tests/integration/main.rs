//! Integration tests for the preset sequencer and reconciliation loop,
//! driven through a recording transport fake.

mod support;

mod reconcile_tests;
