mod remote;

pub use remote::RigGenerator;
