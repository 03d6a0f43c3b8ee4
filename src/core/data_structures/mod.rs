/*!
 * Data Structures
 *
 * Specialized data structures shared by the graph and metadata stores:
 * - Inline strings for stack-allocated small identifiers
 */

mod inline_string;

pub use inline_string::InlineString;
