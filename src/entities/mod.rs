pub mod dish_prediction;
pub mod pos_order;
pub mod pos_order_item;
pub mod reservation;
pub mod sales_import;
