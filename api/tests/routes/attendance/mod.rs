mod qr_test;
mod records_test;
