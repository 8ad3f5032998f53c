pub mod forecasting;
pub mod sales_imports;
