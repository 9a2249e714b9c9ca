


use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Deserialize};








/*
  ------------------------------------------------------------------------------
| lifecycle of a payment application: created Pending, moved exactly once to
| Approved or Rejected, never anywhere after that; the transition itself is a
| single conditional update at the persistence boundary (see workflow.rs)
| ------------------------------------------------------------------------------
*/
#[derive(Default, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status{
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl Status{

    pub fn as_str(&self) -> &'static str{
        match self{
            Status::Pending => "Pending",
            Status::Approved => "Approved",
            Status::Rejected => "Rejected",
        }
    }

    //// a review decision is case sensitive and only ever one of the two
    //// terminal states; Pending is not a decision
    pub fn from_decision(raw: &str) -> Option<Status>{
        match raw{
            "Approved" => Some(Status::Approved),
            "Rejected" => Some(Status::Rejected),
            _ => None,
        }
    }

    pub fn from_filter(raw: &str) -> Option<Status>{
        match raw{
            "Pending" => Some(Status::Pending),
            "Approved" => Some(Status::Approved),
            "Rejected" => Some(Status::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool{
        !matches!(self, Status::Pending)
    }

}




/*
  --------------------------------------------------------------------------------------------
| this struct will be used to serialize/deserialize payment application bson documents of the
| payment_applications collection; the six sensitive attributes only ever hold the
| iv:ciphertext envelope, the review group is null until a review transition lands
| --------------------------------------------------------------------------------------------
*/
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaymentApplication{
    //// the _id key must be absent from the insert payload, not null, or the
    //// driver never generates one and the second insert hits the _id index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub submitted_by: ObjectId,
    pub submitted_by_name: String,
    pub recipient_name: String,
    pub account_number: String,
    pub swift_code: String,
    pub amount: String,
    pub currency: String,
    pub payment_provider: String,
    pub status: Status,
    pub submitted_at: i64, //// set at creation, immutable
    pub reviewed_at: Option<i64>,
    pub reviewed_by: Option<ObjectId>,
    pub reviewer_name: Option<String>,
    pub review_comments: Option<String>,
}




/*
  ---------------------------------------------------------------------------------------
| this struct will be used to deserialize review info json from the client into this
| struct; the decision is validated against Status::from_decision inside the workflow
| ---------------------------------------------------------------------------------------
*/
#[derive(Default, Serialize, Deserialize, Debug, Clone)]
pub struct ReviewRequest{
    pub decision: String,
    pub comments: Option<String>,
}




/*
  ---------------------------------------------------------------------------------------
| the decrypted projection sent back to the caller; a field whose envelope can't be
| decrypted is replaced with the sentinel and named inside undecryptable_fields instead
| of failing the whole read
| ---------------------------------------------------------------------------------------
*/
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView{
    #[serde(rename = "_id")]
    pub _id: Option<ObjectId>,
    pub submitted_by: ObjectId,
    pub submitted_by_name: String,
    pub recipient_name: String,
    pub account_number: String,
    pub swift_code: String,
    pub amount: String,
    pub currency: String,
    pub payment_provider: String,
    pub status: Status,
    pub submitted_at: i64,
    pub reviewed_at: Option<i64>,
    pub reviewed_by: Option<ObjectId>,
    pub reviewer_name: Option<String>,
    pub review_comments: Option<String>,
    pub undecryptable_fields: Vec<String>,
}
