//! Built-in recipes.

pub mod unused_assignments;
pub mod unused_imports;

pub use unused_assignments::RemoveUnusedAssignments;
pub use unused_imports::RemoveUnusedImports;
