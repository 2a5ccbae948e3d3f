mod storage_failure_tests;
