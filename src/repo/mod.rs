mod record_repo;

pub(crate) use record_repo::RecordRepo;
