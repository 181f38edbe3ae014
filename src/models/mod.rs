mod item;
mod sale;
mod user;

pub use item::{Item, ItemImage, ItemPatch, ItemWithImages, NewItem, NewItemImage};
pub use sale::{NewSale, Sale, SaleQuote, SaleWithItem, TopSeller};
pub use user::{NewUser, User};
