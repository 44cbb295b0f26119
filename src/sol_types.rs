use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    contract QuestHunt {
        struct Quest {
            uint256 questId;
            address creator;
            string question;
            string hint;
            bytes32 answer;
            uint256 rewardAmount;
            address rewardToken;
            bool isActive;
            address claimedBy;
        }

        function getQuests(uint256 start, uint256 end) external view returns (Quest[] memory);
        function getOpenQuests(uint256 start, uint256 end) external view returns (Quest[] memory);
        function getEndedQuests(uint256 start, uint256 end) external view returns (Quest[] memory);
        function getQuest(uint256 _questId) external view returns (Quest memory);
        function revenueFees() external view returns (uint256);

        function createQuest(
            string memory _question,
            string memory _hint,
            bytes32 _answer,
            uint256 _rewardAmount,
            address _rewardToken
        ) external payable;
        function submitAnswer(uint256 _questId, bytes32 _answer) external payable;
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}
