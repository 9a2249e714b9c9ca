


use hyper::{server::conn::AddrIncoming, Body, Server};
use routerify::{Router, RouterService};
use std::net::SocketAddr;








pub mod jwt{

    use chrono::Utc;
    use jsonwebtoken::{encode, decode, Header, Algorithm, Validation, EncodingKey, DecodingKey, TokenData};
    use mongodb::bson::oid::ObjectId;
    use serde::{Serialize, Deserialize};
    use crate::schemas::auth::Role;



    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Claims{
        pub _id: Option<ObjectId>, //// mongodb object id of the identity inside the users collection
        pub username: String,
        pub role: Role,
        pub exp: i64, //// expiration timestamp
        pub iat: i64, //// issued timestamp
    }



    pub async fn construct(payload: Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error>{
        encode(&Header::new(Algorithm::HS512), &payload, &EncodingKey::from_secret(secret.as_bytes()))
    }

    //// verification is stateless: nothing but the signing secret and the wall
    //// clock is consulted, so a role change only lands after the token expires
    pub async fn deconstruct(token: &str, secret: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error>{
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0; //// a short lived token must actually be dead right after its ttl
        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
    }

    pub async fn gen_times(ttl: i64) -> (i64, i64){
        let now = Utc::now().timestamp();
        (now, now + ttl)
    }

}








pub mod cipher{

    use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
    use rand::RngCore;
    use scrypt::Params;
    use crate::errors::AppError;

    type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
    type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;

    const KEY_LENGTH: usize = 24; //// 24 bytes for AES-192
    const IV_LENGTH: usize = 16; //// for AES this is always 16
    //// the kdf salt is a fixed non secret constant shared by encrypt and decrypt;
    //// changing it (or the cost params below) invalidates every stored envelope
    const KDF_SALT: &[u8] = b"salt";
    const KDF_LOG_N: u8 = 14;
    const KDF_R: u32 = 8;
    const KDF_P: u32 = 1;



    /*
      ---------------------------------------------------------------------------
    | symmetric encryption of individual string attributes before they reach the
    | document store; the envelope format is hex(iv):hex(ciphertext) with a fresh
    | random iv per call, so equal plaintexts never produce equal envelopes
    | ---------------------------------------------------------------------------
    */
    #[derive(Clone, Debug)]
    pub struct FieldCipher{
        secret: String,
    }

    impl FieldCipher{

        pub fn new(secret: &str) -> FieldCipher{
            FieldCipher{
                secret: secret.to_string(),
            }
        }

        //// scrypt is deliberately expensive; callers must treat every encrypt
        //// and decrypt as blocking cpu bound work on the calling worker
        fn derive_key(&self) -> Result<[u8; KEY_LENGTH], AppError>{
            let params = Params::new(KDF_LOG_N, KDF_R, KDF_P, KEY_LENGTH)
                .map_err(|e| AppError::Internal(format!("invalid scrypt params - {e}")))?;
            let mut key = [0u8; KEY_LENGTH];
            scrypt::scrypt(self.secret.as_bytes(), KDF_SALT, &params, &mut key)
                .map_err(|e| AppError::Internal(format!("scrypt key derivation failed - {e}")))?;
            Ok(key)
        }

        pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError>{
            if plaintext.is_empty(){
                return Ok(plaintext.to_string()); //// empty input passes through, never encrypted
            }
            let key = self.derive_key()?;
            let mut iv = [0u8; IV_LENGTH];
            rand::thread_rng().fill_bytes(&mut iv);
            let encryptor = Aes192CbcEnc::new_from_slices(&key, &iv)
                .map_err(|e| AppError::Internal(format!("cipher init failed - {e}")))?;
            let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
            Ok(format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
        }

        pub fn decrypt(&self, envelope: &str) -> Result<String, AppError>{
            if envelope.is_empty(){
                return Ok(envelope.to_string());
            }
            //// no separator means the value was stored before field encryption
            //// existed; hand it back as the plaintext it already is
            let Some((iv_hex, ciphertext_hex)) = envelope.split_once(':') else{
                return Ok(envelope.to_string());
            };
            let iv = hex::decode(iv_hex).map_err(|_| AppError::DecryptionFailed)?;
            let ciphertext = hex::decode(ciphertext_hex).map_err(|_| AppError::DecryptionFailed)?;
            if iv.len() != IV_LENGTH{
                return Err(AppError::DecryptionFailed);
            }
            let key = self.derive_key()?;
            let decryptor = Aes192CbcDec::new_from_slices(&key, &iv)
                .map_err(|_| AppError::DecryptionFailed)?;
            let plaintext = decryptor.decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
                .map_err(|_| AppError::DecryptionFailed)?;
            String::from_utf8(plaintext).map_err(|_| AppError::DecryptionFailed)
        }

    }

}








pub mod pswd{

    use argon2::{self, Config};
    use rand::RngCore;
    use crate::errors::AppError;

    const SALT_LENGTH: usize = 16;



    //// one way argon2 transform with a fresh random salt per call, so hashing
    //// the same password twice never yields the same encoded output
    pub async fn hash(raw_password: &str) -> Result<String, AppError>{
        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        argon2::hash_encoded(raw_password.as_bytes(), &salt, &Config::default())
            .map_err(|e| AppError::Internal(format!("password hashing failed - {e}")))
    }

    //// Ok(false) on a mismatch; an error only means the stored encoded hash
    //// itself is malformed
    pub async fn verify(raw_password: &str, hashed_password: &str) -> Result<bool, AppError>{
        argon2::verify_encoded(hashed_password, raw_password.as_bytes())
            .map_err(|_| AppError::InvalidHashFormat)
    }

}








pub mod gate{

    use lazy_static::lazy_static;
    use regex::Regex;
    use serde_json::{Map, Value};

    lazy_static!{
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_]{3,16}$").unwrap();
        static ref NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9 .,'-]{2,50}$").unwrap();
        static ref ACCOUNT_NUMBER_RE: Regex = Regex::new(r"^\d{6,20}$").unwrap();
        static ref ID_NUMBER_RE: Regex = Regex::new(r"^\d{13}$").unwrap();
        static ref SWIFT_RE: Regex = Regex::new(r"^[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?$").unwrap();
        static ref AMOUNT_RE: Regex = Regex::new(r"^\d+(\.\d{1,2})?$").unwrap();
        static ref CURRENCY_RE: Regex = Regex::new(r"^[A-Z]{3}$").unwrap();
    }



    pub struct FieldRule{
        pub name: &'static str,
        pub check: fn(&str) -> bool,
        pub message: &'static str,
    }

    fn check_username(value: &str) -> bool{
        USERNAME_RE.is_match(value)
    }

    fn check_name(value: &str) -> bool{
        NAME_RE.is_match(value)
    }

    fn check_account_number(value: &str) -> bool{
        ACCOUNT_NUMBER_RE.is_match(value)
    }

    fn check_id_number(value: &str) -> bool{
        ID_NUMBER_RE.is_match(value)
    }

    fn check_swift(value: &str) -> bool{
        SWIFT_RE.is_match(value)
    }

    //// the regex crate has no lookaheads so the one-letter-one-digit part of
    //// the password contract is checked by hand over the same alphabet
    fn check_password(value: &str) -> bool{
        value.len() >= 6
            && value.chars().all(|c| c.is_ascii_alphanumeric() || "@$!%*?&".contains(c))
            && value.chars().any(|c| c.is_ascii_alphabetic())
            && value.chars().any(|c| c.is_ascii_digit())
    }

    fn check_amount(value: &str) -> bool{
        AMOUNT_RE.is_match(value) && value.parse::<f64>().map(|n| n > 0.0).unwrap_or(false)
    }

    fn check_currency(value: &str) -> bool{
        CURRENCY_RE.is_match(value)
    }



    //// allow lists are the sole defense against a client smuggling unexpected
    //// attributes (a role, a status) into a record
    pub static IDENTITY_ALLOWED: &[&str] = &["username", "full_name", "accountNumber", "IDNumber", "password"];
    pub static PAYMENT_ALLOWED: &[&str] = &["recipientName", "accountNumber", "swiftCode", "amount", "currency", "paymentProvider"];

    pub static IDENTITY_SCHEMA: &[FieldRule] = &[
        FieldRule{ name: "username", check: check_username, message: "username must be 3-16 characters and contain only letters, numbers or underscores" },
        FieldRule{ name: "full_name", check: check_name, message: "full_name must be 2-50 characters of letters, numbers, spaces or .,'-" },
        FieldRule{ name: "accountNumber", check: check_account_number, message: "accountNumber must be 6-20 digits" },
        FieldRule{ name: "IDNumber", check: check_id_number, message: "IDNumber must be exactly 13 digits" },
        FieldRule{ name: "password", check: check_password, message: "password must be at least 6 characters and contain at least one letter and one number" },
    ];

    pub static PAYMENT_SCHEMA: &[FieldRule] = &[
        FieldRule{ name: "recipientName", check: check_name, message: "recipientName must be 2-50 characters of letters, numbers, spaces or .,'-" },
        FieldRule{ name: "accountNumber", check: check_account_number, message: "accountNumber must be 6-20 digits" },
        FieldRule{ name: "swiftCode", check: check_swift, message: "swiftCode must be a valid 8 or 11 character SWIFT/BIC code" },
        FieldRule{ name: "amount", check: check_amount, message: "amount must be a positive number with at most two decimal places" },
        FieldRule{ name: "currency", check: check_currency, message: "currency must be a 3 letter uppercase code" },
        FieldRule{ name: "paymentProvider", check: check_name, message: "paymentProvider must be 2-50 characters of letters, numbers, spaces or .,'-" },
    ];



    pub fn field_as_string(value: &Value) -> Option<String>{
        match value{
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()), //// amounts may arrive as bare json numbers
            _ => None,
        }
    }

    pub fn sanitize(raw_fields: &Map<String, Value>, allowed: &[&str]) -> Map<String, Value>{
        raw_fields
            .iter()
            .filter(|(key, _)| allowed.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    //// all or nothing: errors come back in schema declaration order and the
    //// first one is what the caller surfaces; a missing field fails its rule
    pub fn validate(fields: &Map<String, Value>, schema: &[FieldRule]) -> Result<(), Vec<String>>{
        let mut errors = Vec::new();
        for rule in schema{
            let passed = fields
                .get(rule.name)
                .and_then(field_as_string)
                .map(|value| (rule.check)(&value))
                .unwrap_or(false);
            if !passed{
                errors.push(rule.message.to_string());
            }
        }
        if errors.is_empty(){
            Ok(())
        } else{
            Err(errors)
        }
    }

}








pub async fn build_server(router: Router<Body, hyper::Error>, server_addr: SocketAddr) -> Server<AddrIncoming, RouterService<Body, hyper::Error>>{
    let service = RouterService::new(router).expect("⚠️ can't build the router service");
    Server::bind(&server_addr).serve(service)
}








#[cfg(test)]
mod tests{

    use super::*;
    use crate::errors::AppError;
    use crate::schemas::auth::Role;
    use serde_json::json;



    // -------------------------------- field cipher

    #[test]
    fn cipher_round_trip(){
        let cipher = cipher::FieldCipher::new("test_encryption_key_32_chars_long");
        let envelope = cipher.encrypt("John Doe").unwrap();
        assert_ne!(envelope, "John Doe");
        assert!(envelope.contains(':'));
        let (iv_hex, ct_hex) = envelope.split_once(':').unwrap();
        assert!(iv_hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(ct_hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(cipher.decrypt(&envelope).unwrap(), "John Doe");
    }

    #[test]
    fn cipher_fresh_iv_per_call(){
        let cipher = cipher::FieldCipher::new("test_encryption_key_32_chars_long");
        let first = cipher.encrypt("Test Data").unwrap();
        let second = cipher.encrypt("Test Data").unwrap();
        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first).unwrap(), "Test Data");
        assert_eq!(cipher.decrypt(&second).unwrap(), "Test Data");
    }

    #[test]
    fn cipher_empty_input_passes_through(){
        let cipher = cipher::FieldCipher::new("test_encryption_key_32_chars_long");
        assert_eq!(cipher.encrypt("").unwrap(), "");
        assert_eq!(cipher.decrypt("").unwrap(), "");
    }

    #[test]
    fn cipher_legacy_plaintext_passes_through(){
        let cipher = cipher::FieldCipher::new("test_encryption_key_32_chars_long");
        assert_eq!(cipher.decrypt("stored before encryption existed").unwrap(), "stored before encryption existed");
    }

    #[test]
    fn cipher_malformed_hex_fails(){
        let cipher = cipher::FieldCipher::new("test_encryption_key_32_chars_long");
        assert!(matches!(cipher.decrypt("zz:zz"), Err(AppError::DecryptionFailed)));
    }

    #[test]
    fn cipher_wrong_key_fails(){
        let cipher = cipher::FieldCipher::new("test_encryption_key_32_chars_long");
        let other = cipher::FieldCipher::new("a completely different secret");
        let envelope = cipher.encrypt("Special chars: !@#$%^&*()_+-=[]{}|;:,.<>?").unwrap();
        //// the wrong key must never yield the plaintext; almost always the
        //// padding check fails, on a freak pad match the output is garbage
        match other.decrypt(&envelope){
            Err(AppError::DecryptionFailed) => {},
            Ok(garbled) => assert_ne!(garbled, "Special chars: !@#$%^&*()_+-=[]{}|;:,.<>?"),
            Err(e) => panic!("unexpected error kind {e:?}"),
        }
    }



    // -------------------------------- password hashing

    #[tokio::test]
    async fn pswd_hash_and_verify(){
        let hashed = pswd::hash("s3curePwd!").await.unwrap();
        assert!(pswd::verify("s3curePwd!", &hashed).await.unwrap());
        assert!(!pswd::verify("someOther1", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn pswd_salt_uniqueness(){
        let first = pswd::hash("s3curePwd!").await.unwrap();
        let second = pswd::hash("s3curePwd!").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn pswd_malformed_hash_is_an_error(){
        assert!(matches!(pswd::verify("whatever1", "not-an-encoded-hash").await, Err(AppError::InvalidHashFormat)));
    }



    // -------------------------------- input gate

    #[test]
    fn sanitize_drops_everything_not_allowed(){
        let raw = json!({
            "recipientName": "Jane Roe",
            "accountNumber": "123456789",
            "swiftCode": "DEUTDEFF",
            "amount": "10.50",
            "currency": "EUR",
            "paymentProvider": "SWIFT",
            "role": "Employee",
            "status": "Approved"
        });
        let filtered = gate::sanitize(raw.as_object().unwrap(), gate::PAYMENT_ALLOWED);
        assert_eq!(filtered.len(), 6);
        assert!(!filtered.contains_key("role"));
        assert!(!filtered.contains_key("status"));
        assert_eq!(filtered.get("recipientName"), Some(&json!("Jane Roe")));
    }

    #[test]
    fn validate_accepts_a_well_formed_payment(){
        let fields = json!({
            "recipientName": "Jane Roe",
            "accountNumber": "123456789",
            "swiftCode": "DEUTDEFF500",
            "amount": "10.50",
            "currency": "EUR",
            "paymentProvider": "SWIFT"
        });
        assert!(gate::validate(fields.as_object().unwrap(), gate::PAYMENT_SCHEMA).is_ok());
    }

    #[test]
    fn validate_rejects_negative_amount(){
        let fields = json!({
            "recipientName": "Jane Roe",
            "accountNumber": "123456789",
            "swiftCode": "DEUTDEFF",
            "amount": "-5",
            "currency": "EUR",
            "paymentProvider": "SWIFT"
        });
        let errors = gate::validate(fields.as_object().unwrap(), gate::PAYMENT_SCHEMA).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("amount"));
    }

    #[test]
    fn validate_reports_errors_in_schema_order(){
        //// two bad fields: accountNumber comes before currency in the schema
        //// so its message must be the first surfaced
        let fields = json!({
            "recipientName": "Jane Roe",
            "accountNumber": "12",
            "swiftCode": "DEUTDEFF",
            "amount": "10",
            "currency": "eur",
            "paymentProvider": "SWIFT"
        });
        let errors = gate::validate(fields.as_object().unwrap(), gate::PAYMENT_SCHEMA).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("accountNumber"));
        assert!(errors[1].contains("currency"));
    }

    #[test]
    fn validate_missing_field_fails_its_rule(){
        let fields = json!({
            "username": "jane_roe",
            "full_name": "Jane Roe",
            "accountNumber": "123456789",
            "IDNumber": "9001014800086"
        });
        let errors = gate::validate(fields.as_object().unwrap(), gate::IDENTITY_SCHEMA).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("password"));
    }

    #[test]
    fn validate_swift_code_lengths(){
        for (code, ok) in [("DEUTDEFF", true), ("DEUTDEFF500", true), ("DEUTDEFF5", false), ("deutdeff", false)]{
            let fields = json!({
                "recipientName": "Jane Roe",
                "accountNumber": "123456789",
                "swiftCode": code,
                "amount": "10",
                "currency": "EUR",
                "paymentProvider": "SWIFT"
            });
            assert_eq!(gate::validate(fields.as_object().unwrap(), gate::PAYMENT_SCHEMA).is_ok(), ok, "swift code {code}");
        }
    }

    #[test]
    fn validate_password_contract(){
        for (password, ok) in [("abc123", true), ("abcdef", false), ("123456", false), ("ab12", false), ("pass word1", false), ("P@ssw0rd!", true)]{
            assert_eq!(gate::IDENTITY_SCHEMA[4].name, "password");
            assert_eq!((gate::IDENTITY_SCHEMA[4].check)(password), ok, "password {password}");
        }
    }



    // -------------------------------- session tokens

    #[tokio::test]
    async fn jwt_round_trip(){
        let (iat, exp) = jwt::gen_times(3600).await;
        let claims = jwt::Claims{
            _id: Some(mongodb::bson::oid::ObjectId::new()),
            username: "jane_roe".to_string(),
            role: Role::Employee,
            iat,
            exp,
        };
        let token = jwt::construct(claims.clone(), "test_jwt_secret").await.unwrap();
        let decoded = jwt::deconstruct(&token, "test_jwt_secret").await.unwrap();
        assert_eq!(decoded.claims.username, "jane_roe");
        assert_eq!(decoded.claims.role, Role::Employee);
        assert_eq!(decoded.claims._id, claims._id);
    }

    #[tokio::test]
    async fn jwt_expires_after_its_ttl(){
        let (iat, exp) = jwt::gen_times(1).await;
        let claims = jwt::Claims{
            _id: None,
            username: "jane_roe".to_string(),
            role: Role::Client,
            iat,
            exp,
        };
        let token = jwt::construct(claims, "test_jwt_secret").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert!(jwt::deconstruct(&token, "test_jwt_secret").await.is_err());
    }

    #[tokio::test]
    async fn jwt_rejects_a_foreign_signature(){
        let (iat, exp) = jwt::gen_times(3600).await;
        let claims = jwt::Claims{
            _id: None,
            username: "jane_roe".to_string(),
            role: Role::Client,
            iat,
            exp,
        };
        let token = jwt::construct(claims, "test_jwt_secret").await.unwrap();
        assert!(jwt::deconstruct(&token, "some_other_secret").await.is_err());
    }

}
