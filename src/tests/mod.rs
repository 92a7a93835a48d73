// Test modules for chatsync
// One module per component, plus shared fixtures in `helpers`

mod helpers;
mod reconciler_tests;
