


use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Client, Collection};
use serde_json::{Map, Value};
use crate::constants::*;
use crate::errors::AppError;
use crate::schemas::auth::Identity;
use crate::schemas::payment::{ApplicationView, PaymentApplication, Status};
use crate::utils::cipher::FieldCipher;
use crate::utils::gate;








//// the review-group fields that land together or not at all
#[derive(Debug, Clone)]
pub struct ReviewPatch{
    pub status: Status,
    pub reviewed_at: i64,
    pub reviewed_by: ObjectId,
    pub reviewer_name: String,
    pub review_comments: Option<String>,
}




/*
  -------------------------------------------------------------------------------
| the persistence collaborator seam; the workflow only ever talks to this trait
| so the state machine can be exercised against an in memory store in tests.
| review_if_pending is the load-bearing method: it must express "flip the review
| group only while status is still Pending" as ONE conditional update, otherwise
| two concurrent reviewers can both observe Pending and both win
| -------------------------------------------------------------------------------
*/
#[async_trait]
pub trait ApplicationStore: Send + Sync{

    async fn insert(&self, application: PaymentApplication) -> Result<PaymentApplication, AppError>;
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PaymentApplication>, AppError>;
    async fn find_all(&self) -> Result<Vec<PaymentApplication>, AppError>;
    async fn find_by_status(&self, status: Status) -> Result<Vec<PaymentApplication>, AppError>;
    async fn find_by_submitter(&self, submitter: &ObjectId) -> Result<Vec<PaymentApplication>, AppError>;
    async fn review_if_pending(&self, id: &ObjectId, patch: ReviewPatch) -> Result<Option<PaymentApplication>, AppError>;

}




pub struct MongoStore{
    client: Client,
    db_name: String,
}

impl MongoStore{

    pub fn new(client: Client, db_name: &str) -> MongoStore{
        MongoStore{
            client,
            db_name: db_name.to_string(),
        }
    }

    fn applications(&self) -> Collection<PaymentApplication>{
        self.client.database(&self.db_name).collection::<PaymentApplication>("payment_applications")
    }

    fn newest_first() -> FindOptions{
        FindOptions::builder().sort(doc!{"submitted_at": -1}).build()
    }

    async fn collect(&self, filter: mongodb::bson::Document) -> Result<Vec<PaymentApplication>, AppError>{
        let mut cursor = self.applications().find(filter, Some(Self::newest_first())).await?;
        let mut all = Vec::new();
        while let Some(application) = cursor.try_next().await?{
            all.push(application);
        }
        Ok(all)
    }

}

#[async_trait]
impl ApplicationStore for MongoStore{

    async fn insert(&self, mut application: PaymentApplication) -> Result<PaymentApplication, AppError>{
        let result = self.applications().insert_one(&application, None).await?;
        application._id = result.inserted_id.as_object_id();
        Ok(application)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PaymentApplication>, AppError>{
        Ok(self.applications().find_one(doc!{"_id": id}, None).await?)
    }

    async fn find_all(&self) -> Result<Vec<PaymentApplication>, AppError>{
        self.collect(doc!{}).await
    }

    async fn find_by_status(&self, status: Status) -> Result<Vec<PaymentApplication>, AppError>{
        self.collect(doc!{"status": status.as_str()}).await
    }

    async fn find_by_submitter(&self, submitter: &ObjectId) -> Result<Vec<PaymentApplication>, AppError>{
        self.collect(doc!{"submitted_by": submitter}).await
    }

    //// one round trip: the Pending check and the write are the same mongodb
    //// operation, so of two concurrent reviewers exactly one gets a document
    //// back and the loser sees None
    async fn review_if_pending(&self, id: &ObjectId, patch: ReviewPatch) -> Result<Option<PaymentApplication>, AppError>{
        let update_option = FindOneAndUpdateOptions::builder().return_document(Some(ReturnDocument::After)).build();
        let updated = self.applications().find_one_and_update(
            doc!{"_id": id, "status": Status::Pending.as_str()},
            doc!{"$set": {
                "status": patch.status.as_str(),
                "reviewed_at": Some(patch.reviewed_at),
                "reviewed_by": Some(patch.reviewed_by),
                "reviewer_name": Some(patch.reviewer_name),
                "review_comments": patch.review_comments,
            }},
            Some(update_option),
        ).await?;
        Ok(updated)
    }

}




/*
  -------------------------------------------------------------------------------
| the state machine governing a payment application's lifecycle; composes the
| input gate, the field cipher and the role policy in front of the store.
| stateless per request: one instance is built per handler call and holds no
| cross request mutable state
| -------------------------------------------------------------------------------
*/
pub struct PaymentWorkflow<S: ApplicationStore>{
    store: S,
    cipher: FieldCipher,
}

impl<S: ApplicationStore> PaymentWorkflow<S>{

    pub fn new(store: S, cipher: FieldCipher) -> PaymentWorkflow<S>{
        PaymentWorkflow{
            store,
            cipher,
        }
    }

    pub async fn submit(&self, identity: &Identity, raw_fields: &Map<String, Value>) -> Result<ApplicationView, AppError>{
        if !identity.role.can_submit(){
            return Err(AppError::AccessDenied);
        }
        let submitter = identity._id.ok_or(AppError::AuthInvalid)?;
        let fields = gate::sanitize(raw_fields, gate::PAYMENT_ALLOWED);
        gate::validate(&fields, gate::PAYMENT_SCHEMA)
            .map_err(|errors| AppError::Validation(errors.into_iter().next().unwrap_or_default()))?;
        let field = |name: &str| {
            fields.get(name).and_then(gate::field_as_string).unwrap_or_default()
        };
        let application = PaymentApplication{
            _id: None,
            submitted_by: submitter,
            submitted_by_name: identity.username.clone(),
            recipient_name: self.cipher.encrypt(&field("recipientName"))?,
            account_number: self.cipher.encrypt(&field("accountNumber"))?,
            swift_code: self.cipher.encrypt(&field("swiftCode"))?,
            amount: self.cipher.encrypt(&field("amount"))?,
            currency: self.cipher.encrypt(&field("currency"))?,
            payment_provider: self.cipher.encrypt(&field("paymentProvider"))?,
            status: Status::Pending,
            submitted_at: Utc::now().timestamp(),
            reviewed_at: None,
            reviewed_by: None,
            reviewer_name: None,
            review_comments: None,
        };
        let stored = self.store.insert(application).await?;
        Ok(self.decrypt_view(stored))
    }

    pub async fn review(&self, identity: &Identity, id: &ObjectId, decision: &str, comments: Option<String>) -> Result<ApplicationView, AppError>{
        if !identity.role.can_review(){
            return Err(AppError::AccessDenied);
        }
        let status = Status::from_decision(decision).ok_or(AppError::InvalidDecision)?;
        let reviewer = identity._id.ok_or(AppError::AuthInvalid)?;
        let patch = ReviewPatch{
            status,
            reviewed_at: Utc::now().timestamp(),
            reviewed_by: reviewer,
            reviewer_name: identity.username.clone(),
            review_comments: comments,
        };
        match self.store.review_if_pending(id, patch).await?{
            Some(updated) => Ok(self.decrypt_view(updated)),
            //// the conditional update matched nothing: either the record never
            //// existed or another reviewer already moved it out of Pending
            None => match self.store.find_by_id(id).await?{
                Some(_) => Err(AppError::AlreadyReviewed),
                None => Err(AppError::NotFound),
            },
        }
    }

    pub async fn get(&self, identity: &Identity, id: &ObjectId) -> Result<ApplicationView, AppError>{
        let application = self.store.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        if !identity.can_view(&application){
            return Err(AppError::AccessDenied);
        }
        Ok(self.decrypt_view(application))
    }

    pub async fn list_all(&self, identity: &Identity) -> Result<Vec<ApplicationView>, AppError>{
        if !identity.role.can_list_all(){
            return Err(AppError::AccessDenied);
        }
        let all = self.store.find_all().await?;
        Ok(all.into_iter().map(|a| self.decrypt_view(a)).collect())
    }

    pub async fn list_mine(&self, identity: &Identity) -> Result<Vec<ApplicationView>, AppError>{
        let submitter = identity._id.ok_or(AppError::AuthInvalid)?;
        let mine = self.store.find_by_submitter(&submitter).await?;
        Ok(mine.into_iter().map(|a| self.decrypt_view(a)).collect())
    }

    pub async fn list_by_status(&self, identity: &Identity, status: Status) -> Result<Vec<ApplicationView>, AppError>{
        if !identity.role.can_list_by_status(){
            return Err(AppError::AccessDenied);
        }
        let matching = self.store.find_by_status(status).await?;
        Ok(matching.into_iter().map(|a| self.decrypt_view(a)).collect())
    }

    //// best effort per field: one undecryptable envelope must not take the
    //// whole record down, it gets the sentinel and its name in the flag list
    fn decrypt_view(&self, application: PaymentApplication) -> ApplicationView{
        let mut undecryptable_fields = Vec::new();
        let mut field = |name: &str, envelope: &str| match self.cipher.decrypt(envelope){
            Ok(plaintext) => plaintext,
            Err(_) => {
                undecryptable_fields.push(name.to_string());
                UNDECRYPTABLE.to_string()
            },
        };
        let recipient_name = field("recipientName", &application.recipient_name);
        let account_number = field("accountNumber", &application.account_number);
        let swift_code = field("swiftCode", &application.swift_code);
        let amount = field("amount", &application.amount);
        let currency = field("currency", &application.currency);
        let payment_provider = field("paymentProvider", &application.payment_provider);
        ApplicationView{
            _id: application._id,
            submitted_by: application.submitted_by,
            submitted_by_name: application.submitted_by_name,
            recipient_name,
            account_number,
            swift_code,
            amount,
            currency,
            payment_provider,
            status: application.status,
            submitted_at: application.submitted_at,
            reviewed_at: application.reviewed_at,
            reviewed_by: application.reviewed_by,
            reviewer_name: application.reviewer_name,
            review_comments: application.review_comments,
            undecryptable_fields,
        }
    }

}








#[cfg(test)]
mod tests{

    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use crate::schemas::auth::Role;
    use serde_json::json;



    //// in memory rendition of the persistence collaborator; the pending check
    //// and the write inside review_if_pending happen under one lock so the
    //// conditional-update contract holds here too
    #[derive(Default)]
    struct MemoryStore{
        records: Mutex<HashMap<ObjectId, PaymentApplication>>,
    }

    impl MemoryStore{
        fn len(&self) -> usize{
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ApplicationStore for MemoryStore{

        async fn insert(&self, mut application: PaymentApplication) -> Result<PaymentApplication, AppError>{
            let id = ObjectId::new();
            application._id = Some(id);
            self.records.lock().unwrap().insert(id, application.clone());
            Ok(application)
        }

        async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PaymentApplication>, AppError>{
            Ok(self.records.lock().unwrap().get(id).cloned())
        }

        async fn find_all(&self) -> Result<Vec<PaymentApplication>, AppError>{
            let mut all: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
            all.sort_by_key(|a| std::cmp::Reverse(a.submitted_at));
            Ok(all)
        }

        async fn find_by_status(&self, status: Status) -> Result<Vec<PaymentApplication>, AppError>{
            let mut matching: Vec<_> = self.records.lock().unwrap().values().filter(|a| a.status == status).cloned().collect();
            matching.sort_by_key(|a| std::cmp::Reverse(a.submitted_at));
            Ok(matching)
        }

        async fn find_by_submitter(&self, submitter: &ObjectId) -> Result<Vec<PaymentApplication>, AppError>{
            let mut mine: Vec<_> = self.records.lock().unwrap().values().filter(|a| a.submitted_by == *submitter).cloned().collect();
            mine.sort_by_key(|a| std::cmp::Reverse(a.submitted_at));
            Ok(mine)
        }

        async fn review_if_pending(&self, id: &ObjectId, patch: ReviewPatch) -> Result<Option<PaymentApplication>, AppError>{
            let mut records = self.records.lock().unwrap();
            match records.get_mut(id){
                Some(application) if !application.status.is_terminal() => {
                    application.status = patch.status;
                    application.reviewed_at = Some(patch.reviewed_at);
                    application.reviewed_by = Some(patch.reviewed_by);
                    application.reviewer_name = Some(patch.reviewer_name);
                    application.review_comments = patch.review_comments;
                    Ok(Some(application.clone()))
                },
                _ => Ok(None),
            }
        }

    }



    fn client() -> Identity{
        Identity{
            _id: Some(ObjectId::new()),
            username: "jane_roe".to_string(),
            role: Role::Client,
        }
    }

    fn employee() -> Identity{
        Identity{
            _id: Some(ObjectId::new()),
            username: "mark_reviewer".to_string(),
            role: Role::Employee,
        }
    }

    fn workflow() -> PaymentWorkflow<MemoryStore>{
        PaymentWorkflow::new(MemoryStore::default(), FieldCipher::new("test_encryption_key_32_chars_long"))
    }

    fn valid_fields() -> Map<String, Value>{
        json!({
            "recipientName": "Jane Roe",
            "accountNumber": "123456789",
            "swiftCode": "DEUTDEFF500",
            "amount": "250.75",
            "currency": "EUR",
            "paymentProvider": "SWIFT"
        }).as_object().unwrap().clone()
    }



    #[test]
    fn an_unsaved_record_serializes_without_an_id_key(){
        //// mongodb only generates an ObjectId when the _id key is missing from
        //// the insert payload; an explicit null would be stored as the id
        let application = PaymentApplication{
            _id: None,
            submitted_by: ObjectId::new(),
            submitted_by_name: "jane_roe".to_string(),
            recipient_name: "envelope".to_string(),
            account_number: "envelope".to_string(),
            swift_code: "envelope".to_string(),
            amount: "envelope".to_string(),
            currency: "envelope".to_string(),
            payment_provider: "envelope".to_string(),
            status: Status::Pending,
            submitted_at: Utc::now().timestamp(),
            reviewed_at: None,
            reviewed_by: None,
            reviewer_name: None,
            review_comments: None,
        };
        let document = mongodb::bson::to_document(&application).unwrap();
        assert!(!document.contains_key("_id"));

        let user = crate::schemas::auth::UserInfo{ _id: None, ..Default::default() };
        let document = mongodb::bson::to_document(&user).unwrap();
        assert!(!document.contains_key("_id"));
    }

    #[tokio::test]
    async fn submit_then_get_returns_the_original_plaintext(){
        let workflow = workflow();
        let submitter = client();
        let submitted = workflow.submit(&submitter, &valid_fields()).await.unwrap();
        assert_eq!(submitted.status, Status::Pending);
        assert!(submitted._id.is_some());

        //// the stored record must hold envelopes, not plaintext
        let stored = workflow.store.find_by_id(&submitted._id.unwrap()).await.unwrap().unwrap();
        assert_ne!(stored.recipient_name, "Jane Roe");
        assert!(stored.recipient_name.contains(':'));

        let fetched = workflow.get(&submitter, &submitted._id.unwrap()).await.unwrap();
        assert_eq!(fetched.recipient_name, "Jane Roe");
        assert_eq!(fetched.account_number, "123456789");
        assert_eq!(fetched.swift_code, "DEUTDEFF500");
        assert_eq!(fetched.amount, "250.75");
        assert_eq!(fetched.currency, "EUR");
        assert_eq!(fetched.payment_provider, "SWIFT");
        assert!(fetched.undecryptable_fields.is_empty());
    }

    #[tokio::test]
    async fn negative_amount_is_rejected_and_nothing_is_written(){
        let workflow = workflow();
        let mut fields = valid_fields();
        fields.insert("amount".to_string(), json!("-5"));
        let err = workflow.submit(&client(), &fields).await.unwrap_err();
        match err{
            AppError::Validation(message) => assert!(message.contains("amount")),
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert_eq!(workflow.store.len(), 0);
    }

    #[tokio::test]
    async fn injected_status_field_is_dropped_by_the_gate(){
        let workflow = workflow();
        let mut fields = valid_fields();
        fields.insert("status".to_string(), json!("Approved"));
        let submitted = workflow.submit(&client(), &fields).await.unwrap();
        assert_eq!(submitted.status, Status::Pending);
    }

    #[tokio::test]
    async fn employee_cannot_submit(){
        let workflow = workflow();
        assert!(matches!(workflow.submit(&employee(), &valid_fields()).await, Err(AppError::AccessDenied)));
    }

    #[tokio::test]
    async fn client_cannot_review_and_the_application_stays_pending(){
        let workflow = workflow();
        let submitter = client();
        let submitted = workflow.submit(&submitter, &valid_fields()).await.unwrap();
        let id = submitted._id.unwrap();
        assert!(matches!(workflow.review(&submitter, &id, "Approved", None).await, Err(AppError::AccessDenied)));
        let stored = workflow.store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, Status::Pending);
    }

    #[tokio::test]
    async fn decision_must_be_exact(){
        let workflow = workflow();
        let submitted = workflow.submit(&client(), &valid_fields()).await.unwrap();
        let id = submitted._id.unwrap();
        for bad in ["approved", "REJECTED", "Pending", "maybe"]{
            assert!(matches!(workflow.review(&employee(), &id, bad, None).await, Err(AppError::InvalidDecision)), "decision {bad}");
        }
    }

    #[tokio::test]
    async fn review_of_a_missing_application_is_not_found(){
        let workflow = workflow();
        assert!(matches!(workflow.review(&employee(), &ObjectId::new(), "Approved", None).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn review_sets_the_whole_review_group_once(){
        let workflow = workflow();
        let submitted = workflow.submit(&client(), &valid_fields()).await.unwrap();
        let id = submitted._id.unwrap();
        let reviewer = employee();
        let reviewed = workflow.review(&reviewer, &id, "Approved", Some("looks fine".to_string())).await.unwrap();
        assert_eq!(reviewed.status, Status::Approved);
        assert_eq!(reviewed.reviewed_by, reviewer._id);
        assert_eq!(reviewed.reviewer_name.as_deref(), Some("mark_reviewer"));
        assert_eq!(reviewed.review_comments.as_deref(), Some("looks fine"));
        assert!(reviewed.reviewed_at.is_some());

        //// terminal: the second transition must be refused
        assert!(matches!(workflow.review(&reviewer, &id, "Rejected", None).await, Err(AppError::AlreadyReviewed)));
        let stored = workflow.store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, Status::Approved);
    }

    #[tokio::test]
    async fn concurrent_reviews_have_exactly_one_winner(){
        let workflow = Arc::new(workflow());
        let submitted = workflow.submit(&client(), &valid_fields()).await.unwrap();
        let id = submitted._id.unwrap();

        let approve = {
            let workflow = Arc::clone(&workflow);
            let reviewer = employee();
            tokio::spawn(async move{
                workflow.review(&reviewer, &id, "Approved", None).await
            })
        };
        let reject = {
            let workflow = Arc::clone(&workflow);
            let reviewer = employee();
            tokio::spawn(async move{
                workflow.review(&reviewer, &id, "Rejected", None).await
            })
        };

        let approve = approve.await.unwrap();
        let reject = reject.await.unwrap();
        let approve_won = approve.is_ok();
        let winners = [approve_won, reject.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(winners, 1);
        let loser = if approve_won{ reject } else{ approve };
        assert!(matches!(loser, Err(AppError::AlreadyReviewed)));

        let stored = workflow.store.find_by_id(&id).await.unwrap().unwrap();
        let winner_status = if approve_won{ Status::Approved } else{ Status::Rejected };
        assert_eq!(stored.status, winner_status);
    }

    #[tokio::test]
    async fn a_stranger_client_cannot_view_someone_elses_application(){
        let workflow = workflow();
        let submitted = workflow.submit(&client(), &valid_fields()).await.unwrap();
        let id = submitted._id.unwrap();
        assert!(matches!(workflow.get(&client(), &id).await, Err(AppError::AccessDenied)));
        //// but any employee can
        assert!(workflow.get(&employee(), &id).await.is_ok());
    }

    #[tokio::test]
    async fn a_corrupted_envelope_flags_only_that_field(){
        let workflow = workflow();
        let submitted = workflow.submit(&client(), &valid_fields()).await.unwrap();
        let id = submitted._id.unwrap();
        {
            let mut records = workflow.store.records.lock().unwrap();
            let record = records.get_mut(&id).unwrap();
            record.swift_code = "00ff:deadbeef".to_string(); //// valid hex, garbage ciphertext
        }
        let fetched = workflow.get(&employee(), &id).await.unwrap();
        assert_eq!(fetched.swift_code, UNDECRYPTABLE);
        assert_eq!(fetched.undecryptable_fields, vec!["swiftCode".to_string()]);
        //// every other field still decrypts
        assert_eq!(fetched.recipient_name, "Jane Roe");
        assert_eq!(fetched.amount, "250.75");
    }

    #[tokio::test]
    async fn listings_are_scoped_by_role(){
        let workflow = workflow();
        let first_client = client();
        let second_client = client();
        workflow.submit(&first_client, &valid_fields()).await.unwrap();
        workflow.submit(&second_client, &valid_fields()).await.unwrap();

        assert!(matches!(workflow.list_all(&first_client).await, Err(AppError::AccessDenied)));
        assert_eq!(workflow.list_all(&employee()).await.unwrap().len(), 2);
        assert_eq!(workflow.list_mine(&first_client).await.unwrap().len(), 1);
        assert!(matches!(workflow.list_by_status(&first_client, Status::Pending).await, Err(AppError::AccessDenied)));
        assert_eq!(workflow.list_by_status(&employee(), Status::Pending).await.unwrap().len(), 2);
        assert_eq!(workflow.list_by_status(&employee(), Status::Approved).await.unwrap().len(), 0);
    }

}
