/*!
 * Model
*/
pub mod manifest;
pub mod manifest_list;
pub mod snapshot;
pub mod table_metadata;
