mod helpers;

mod admin_test;
