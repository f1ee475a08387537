pub mod data {
    pub mod datasources {
        pub mod purchased_product_datasource;
        pub mod receipt_file_datasource;
        pub(crate) mod utils;
        pub mod verify_receipt_api_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod ledger {
            pub(crate) mod ledger_file_model;
        }
        pub(crate) mod verify_receipt {
            pub(crate) mod latest_receipt_info_model;
            pub(crate) mod request_body_model;
        }
    }
    pub mod repositories {
        pub mod iap_repository_impl;
        pub mod purchased_product_ledger_impl;
    }
}

pub mod domain {
    pub mod entities {
        pub mod iap_product;
        pub mod iap_product_id;
        pub mod iap_transaction;
        pub mod iap_update_notification;
        pub mod iap_verification_result;
    }
    pub mod platform {
        pub mod payment_queue;
        pub mod product_catalog;
    }
    pub mod repositories {
        pub mod iap_repository;
        pub mod purchased_product_ledger;
    }
}

pub mod workflow {
    pub mod catalog_fetcher;
    pub mod iap_events;
    pub mod purchase_initiator;
    pub mod receipt_validator;
    pub mod transaction_observer;
}

pub mod config;
pub mod constants;
pub mod errors;
pub mod secrets;
pub mod util;
