mod expense_tests;
