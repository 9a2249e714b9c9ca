


pub type MainResult<T, E> = std::result::Result<T, E>;
pub type GenericError = Box<dyn std::error::Error + Send + Sync>;
pub type GenericResult<T, E> = std::result::Result<T, E>;

pub static INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
pub static AUTH_FAILED: &str = "Authentication Failed"; //// same message for every token/credential failure so the response never leaks which part was wrong
pub static ACCESS_DENIED: &str = "Access Denied";
pub static WELCOME: &str = "Welcome Home";
pub static NOT_ACCEPTABLE: &str = "Not Acceptable";
pub static BAD_REQUEST: &str = "Bad Request";
pub static REGISTERED: &str = "Registered Successfully";
pub static USERNAME_TAKEN: &str = "Username Is Already Taken";
pub static ACCESS_GRANTED: &str = "Access Granted";
pub static SUBMITTED: &str = "Payment Application Submitted Successfully";
pub static REVIEWED: &str = "Payment Application Reviewed Successfully";
pub static FETCHED: &str = "Fetched Successfully";
pub static NOT_FOUND_APPLICATION: &str = "Payment Application Not Found";
pub static ALREADY_REVIEWED: &str = "Payment Application Has Already Been Reviewed";
pub static INVALID_DECISION: &str = "Decision Must Be Either Approved Or Rejected";
pub static INVALID_APPLICATION_ID: &str = "Invalid Application Id";
pub static INVALID_STATUS_FILTER: &str = "Invalid Status Filter";
pub static NOT_FOUND_ROUTE: &str = "Not Found Route";

//// value a sensitive field is replaced with inside a read response when its
//// envelope can't be decrypted; the read itself still succeeds
pub static UNDECRYPTABLE: &str = "[decryption-failed]";
