// Module exports for pure logic
pub mod ordering;     // Splice moves and display order
pub mod tabs;         // Tab store
pub mod quick_links;  // Quick link store
pub mod deletion;     // Tab deletion confirmation flow
pub mod transfer;     // Backup export/import
