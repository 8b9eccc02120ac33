mod goal_fixtures;
