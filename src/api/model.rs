use serde::Deserialize;

use crate::troop::model::TrainRequest;

pub const TRAIN_METHOD: &str = "train";

#[derive(Deserialize, Debug, Clone)]
pub struct ApiRequest<T = TrainRequest> {
    pub id: String,
    pub method: String,
    pub params: T,
}
