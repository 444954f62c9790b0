pub mod predictor;
