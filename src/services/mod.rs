// MangaHub services
// Services talk to the outside world: the manga API and local storage.

pub mod catalog_client;
pub mod chapter_loader;
pub mod mock_transport;
pub mod storage;
pub mod transport;
