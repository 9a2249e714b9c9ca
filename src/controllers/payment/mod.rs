

pub mod submit;
pub mod review;
pub mod get;
pub mod list;
pub mod _404;

use mongodb::Client;
use crate::contexts::app::SecurityConfig;
use crate::utils::cipher::FieldCipher;
use crate::workflow::{MongoStore, PaymentWorkflow};

//// one workflow instance per handler call; it holds no cross request state
//// and everything it needs arrives as an argument, nothing ambient
pub(crate) fn build_workflow(db: Client, config: &SecurityConfig, db_name: &str) -> PaymentWorkflow<MongoStore>{
    PaymentWorkflow::new(MongoStore::new(db, db_name), FieldCipher::new(&config.cipher_secret))
}




#[cfg(test)]
mod tests{

    use super::*;

    #[tokio::test]
    async fn building_a_workflow_reads_nothing_from_the_environment(){
        std::env::remove_var("DB_NAME");
        //// the client is lazy, nothing is contacted until the first operation
        let db = Client::with_uri_str("mongodb://localhost:27017").await.unwrap();
        let config = SecurityConfig{
            cipher_secret: "test_encryption_key_32_chars_long".to_string(),
            token_secret: "test_jwt_secret".to_string(),
            token_ttl: 60,
        };
        let _workflow = build_workflow(db, &config, "swiftx");
    }

}
