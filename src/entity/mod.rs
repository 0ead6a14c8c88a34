pub mod customers;
pub mod messages;
pub mod order_items;
pub mod order_status_history;
pub mod orders;
pub mod payments;
pub mod products;
pub mod shops;
pub mod users;

pub use customers::Entity as Customers;
pub use messages::Entity as Messages;
pub use order_items::Entity as OrderItems;
pub use order_status_history::Entity as OrderStatusHistory;
pub use orders::Entity as Orders;
pub use payments::Entity as Payments;
pub use products::Entity as Products;
pub use shops::Entity as Shops;
pub use users::Entity as Users;
