


use mongodb::bson::oid::ObjectId;
use serde::{Serialize, Deserialize};
use crate::schemas::payment::PaymentApplication;
use crate::utils::jwt;








/*
  -------------------------------------------------------------------------------
| the role is assigned at creation and immutable afterwards; there is no self
| promotion path since the whitelist gate drops any role attribute a client
| tries to smuggle into signup, and nothing else ever writes the field
| -------------------------------------------------------------------------------
*/
#[derive(Default, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role{
    #[default]
    Client,
    Employee,
}

impl Role{

    //// role to permitted-operations mapping; controllers never compare roles
    //// directly, they ask these
    pub fn can_submit(&self) -> bool{
        matches!(self, Role::Client)
    }

    pub fn can_review(&self) -> bool{
        matches!(self, Role::Employee)
    }

    pub fn can_list_all(&self) -> bool{
        matches!(self, Role::Employee)
    }

    pub fn can_list_by_status(&self) -> bool{
        matches!(self, Role::Employee)
    }

}




/*
  ----------------------------------------------------------------------------
| a verified principal recovered from a session token; everything the
| workflow needs to authorize an operation without another storage lookup
| ----------------------------------------------------------------------------
*/
#[derive(Debug, Clone)]
pub struct Identity{
    pub _id: Option<ObjectId>,
    pub username: String,
    pub role: Role,
}

impl Identity{

    //// a record is visible to the identity that submitted it and to any employee
    pub fn can_view(&self, application: &PaymentApplication) -> bool{
        self.role.can_list_all()
            || self._id.map(|id| id == application.submitted_by).unwrap_or(false)
    }

}

impl From<jwt::Claims> for Identity{
    fn from(claims: jwt::Claims) -> Identity{
        Identity{
            _id: claims._id,
            username: claims.username,
            role: claims.role,
        }
    }
}




/*
  ----------------------------------------------------------------------------------------
| this struct will be used to deserialize user info bson from the mongodb into this struct
| ----------------------------------------------------------------------------------------
| full_name, account_number and id_number only ever hold the iv:ciphertext envelope
|
*/
#[derive(Default, Serialize, Deserialize, Debug, Clone)]
pub struct UserInfo{
    #[serde(skip_serializing_if = "Option::is_none")] //// absent, never null, so the driver generates the id on insert
    pub _id: Option<ObjectId>, //// this is the user id inside the users collection
    pub username: String, //// plaintext, it's the lookup key
    pub pwd: String, //// argon2 encoded hash, never reversible
    pub full_name: String,
    pub account_number: String,
    pub id_number: String,
    pub role: Role,
    pub created_at: Option<i64>,
    pub last_login_time: Option<i64>,
}




/*
  -------------------------------------------------------------------------------------
| this struct will be used to deserialize login info json from client into this struct
| -------------------------------------------------------------------------------------
*/
#[derive(Default, Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest{
    pub username: String,
    pub password: String,
}




#[derive(Default, Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse{
    pub _id: Option<ObjectId>,
    pub access_token: String,
    pub username: String,
    pub role: Role,
    pub last_login_time: Option<i64>,
}




//// no hash and no sensitive attributes go back to the caller after a signup
#[derive(Default, Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse{
    pub _id: Option<ObjectId>,
    pub username: String,
    pub role: Role,
    pub created_at: Option<i64>,
}
